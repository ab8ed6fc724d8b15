// src/internal/server/server.rs

use anyhow::{Context, Result};
use rmcp::{
    model::*,
    service::RequestContext,
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
    ErrorData as McpError, RoleServer, ServerHandler,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use crate::internal::config::{AppConfig, ServerMode};
use crate::internal::context::ServiceContext;
use crate::internal::mcp::processor::McpProcessor;
use crate::internal::mcp::registry::ToolRegistry;
use crate::internal::server::handler::Handler;
use crate::internal::server::tool::ToolHandler;
use crate::internal::transport::{StdioTransport, TransportRunner};

/// Server exposes the endpoint registry as MCP tools, over stdio or over
/// streamable HTTP.
#[derive(Clone)]
pub struct Server {
    pub config: AppConfig,
    context: Arc<ServiceContext>,
    tool_registry: Arc<ToolRegistry>,
}

impl ServerHandler for Server {
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(
            self.tool_registry.list_metadata(),
        ))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let Some(tool) = self.tool_registry.get(request.name.as_ref()) else {
            return Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Tool '{}' not found", request.name),
                None,
            ));
        };

        info!("Calling tool {}", request.name);
        (tool.executor)(request.arguments.unwrap_or_default()).await
    }

    fn get_info(&self) -> ServerInfo {
        InitializeResult {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Discover and call the GET endpoints of an API: search_endpoints finds \
                 endpoints, get_available_params lists their parameters, call_get \
                 invokes them."
                    .into(),
            ),
        }
    }
}

impl Server {
    pub fn new(config: AppConfig, context: Arc<ServiceContext>) -> Self {
        let tool_registry = Arc::new(ToolRegistry::new());
        ToolHandler::new(Arc::clone(&context)).register_tools(&tool_registry);
        info!("Registered {} tools", tool_registry.count());

        Self {
            config,
            context,
            tool_registry,
        }
    }

    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.context
    }

    pub fn tool_registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.tool_registry)
    }

    pub fn tool_count(&self) -> usize {
        self.tool_registry.count()
    }

    /// Line-delimited JSON-RPC processor over the shared tool registry.
    pub fn processor(&self) -> McpProcessor {
        McpProcessor::new(self.get_info(), self.tool_registry())
    }

    /// Serve in STDIO mode (primary MCP mode)
    async fn serve_stdio(&self) -> Result<()> {
        info!("Starting STDIO server with {} tools", self.tool_count());

        let mut runner = TransportRunner::new(StdioTransport::new(), Arc::new(self.processor()));
        runner.run().await.context("STDIO transport failed")?;

        info!("STDIO client disconnected");
        Ok(())
    }

    /// Serve the MCP streamable HTTP endpoint at `/mcp`, plus `/health`
    async fn serve_http(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);

        let server = self.clone();
        let mcp_service = StreamableHttpService::new(
            move || Ok(server.clone()),
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig::default(),
        );

        let app = Handler::new(Arc::clone(self.context.registry()))
            .create_http_router()
            .nest_service("/mcp", mcp_service);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to address: {}", addr))?;

        info!("HTTP MCP server listening on {}", addr);
        info!("  - http://{}/mcp - MCP streamable HTTP endpoint", addr);
        info!("  - GET http://{}/health - Health check", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        Ok(())
    }

    /// Start the server in the configured mode
    pub async fn start(&self) -> Result<()> {
        info!(
            "Starting server in {:?} mode, version: {} with {} tools",
            self.config.server.mode,
            self.config.server.version,
            self.tool_count()
        );

        match self.config.server.mode {
            ServerMode::Stdio => self.serve_stdio().await,
            ServerMode::Http => self.serve_http().await,
        }
    }

    /// Start the server and close the upstream client when it stops or on
    /// Ctrl-C.
    pub async fn start_with_graceful_shutdown(&self) -> Result<()> {
        let result = tokio::select! {
            result = self.start() => result,
            _ = shutdown_signal() => {
                info!("Shutting down gracefully");
                Ok(())
            }
        };

        self.context.close();
        if let Err(e) = &result {
            error!("Server stopped with error: {:#}", e);
        }
        result
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

/// Load the API description, build the service context and the server.
pub fn create_server(config: AppConfig) -> Result<Server> {
    let context = ServiceContext::from_config(&config).context("Failed to build service context")?;
    Ok(Server::new(config, Arc::new(context)))
}
