pub mod coerce;
pub mod dispatcher;

pub use dispatcher::Dispatcher;
