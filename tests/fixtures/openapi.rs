//! API descriptions used across the integration tests

/// Market data API with one malformed operation and one POST-only path.
pub const MARKET_API_YAML: &str = r##"
openapi: 3.0.3
info:
  title: Market Data API
  version: "1.0"
paths:
  /stock/{ticker}/greeks:
    get:
      summary: Greek exposure for a ticker
      tags: [Stock]
      parameters:
        - name: ticker
          in: path
          required: true
          description: Stock symbol
          schema: { type: string }
        - name: expiry
          in: query
          description: Option expiry date (YYYY-MM-DD)
          schema: { type: string, format: date }
        - name: X-Request-Id
          in: header
          schema: { type: string }
      responses:
        "200":
          description: Greeks by strike
          content:
            application/json:
              schema: { $ref: "#/components/schemas/GreeksResponse" }
  /stock/{ticker}/flow-alerts:
    get:
      summary: Options flow alerts
      tags: [Stock, Flow]
      parameters:
        - name: ticker
          in: path
          required: true
          schema: { type: string }
        - $ref: "#/components/parameters/Limit"
        - name: is_call
          in: query
          schema: { type: boolean }
        - name: side
          in: query
          schema:
            type: array
            items: { type: string, enum: [bid, ask] }
      responses:
        "200": { description: ok }
  /market/market-tide:
    get:
      description: Net premium flow across the whole market
      tags: [Market]
      parameters:
        - name: date
          in: query
          schema: { $ref: "#/components/schemas/Date" }
        - name: interval
          in: query
          schema: { type: string, enum: [1m, 5m] }
      responses:
        "200": { description: ok }
  /option-contract/{id}/historic:
    parameters:
      - name: id
        in: path
        required: true
        description: Option symbol
        schema: { type: string }
      - name: limit
        in: query
        schema: { type: integer }
    get:
      summary: Historic contract data
      tags: [Contract]
      parameters:
        - name: limit
          in: query
          required: true
          description: Rows to return
          schema: { type: integer }
      responses:
        "200": { description: ok }
  /darkpool/{ticker}:
    get:
      summary: Darkpool trades for a ticker
      tags: [Darkpool]
      responses:
        "200": { description: ok }
  /internal/status:
    get:
      summary: Upstream status
      tags: [Internal]
      responses:
        "200": { description: ok }
  /broken:
    get:
      summary: References a parameter that does not exist
      parameters:
        - $ref: "#/components/parameters/DoesNotExist"
      responses:
        "200": { description: ok }
  /alerts:
    post:
      summary: Create an alert
      responses:
        "201": { description: created }
components:
  parameters:
    Limit:
      name: limit
      in: query
      description: Maximum number of results
      schema: { type: integer, minimum: 1, maximum: 500 }
  schemas:
    Date: { type: string, format: date }
    GreeksResponse:
      type: object
      properties:
        data:
          type: array
          items: { $ref: "#/components/schemas/Greek" }
    Greek:
      type: object
      properties:
        strike: { type: number }
"##;

/// Registered GET paths of `MARKET_API_YAML`, in document order.
pub const MARKET_API_PATHS: [&str; 6] = [
    "/stock/{ticker}/greeks",
    "/stock/{ticker}/flow-alerts",
    "/market/market-tide",
    "/option-contract/{id}/historic",
    "/darkpool/{ticker}",
    "/internal/status",
];

/// Smallest valid description, as JSON.
pub const MINIMAL_API_JSON: &str = r#"{
  "openapi": "3.0.3",
  "info": { "title": "Minimal", "version": "1" },
  "paths": {
    "/ping": { "get": { "summary": "Health probe", "responses": { "200": { "description": "ok" } } } }
  }
}"#;

/// OpenAPI 3.1 description: no `responses`, nullable type lists, and two
/// operations that really are malformed.
pub const OPENAPI_31_YAML: &str = r##"
openapi: 3.1.0
info: { title: Nullable, version: "1" }
paths:
  /quotes/{symbol}:
    get:
      summary: Latest quote
      parameters:
        - name: symbol
          in: path
          required: true
          schema: { type: string }
        - name: session
          in: query
          schema: { type: [string, "null"], enum: [pre, regular, post, null] }
        - name: depth
          in: query
          schema: { type: ["null", integer] }
  /calendar:
    get:
      description: Market holidays
      tags: [Reference]
  /not-an-operation:
    get: "just a string"
  /nameless:
    get:
      summary: Parameter without a name
      parameters:
        - in: query
          schema: { type: string }
"##;
