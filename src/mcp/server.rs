//! RMCP-based MCP server driving the provider host.

use crate::core::tfflow::TfFlow;
use crate::mcp::types::*;
use crate::provider::diagnostics::Diagnostics;
use crate::provider::host::FlowProvider;
use crate::provider::security_group_attachment::TYPE_NAME;
use crate::shared::logging;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, InitializeResult,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities,
        ToolsCapability,
    },
    service::{RequestContext, RoleServer, ServiceExt},
    tool, tool_router,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// RMCP-based MCP server exposing the resource lifecycle as tools.
#[derive(Clone)]
pub struct TfFlowServer {
    provider: Arc<FlowProvider>,
    tool_router: ToolRouter<Self>,
}

fn to_value(input: AttachmentInput) -> Value {
    serde_json::to_value(input).unwrap_or_default()
}

fn state_result(key: &str, state: Value) -> CallToolResult {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), state);
    let json = serde_json::to_string_pretty(&Value::Object(body)).unwrap_or_default();
    CallToolResult::success(vec![Content::text(json)])
}

fn diagnostics_result(action: &str, diags: Diagnostics) -> CallToolResult {
    let json = serde_json::to_string_pretty(&serde_json::json!({
        "error": format!("Failed to {}", action),
        "diagnostics": diags
    }))
    .unwrap_or_default();
    CallToolResult::error(vec![Content::text(json)])
}

#[tool_router]
impl TfFlowServer {
    /// Create a new TfFlowServer instance.
    pub fn new(tfflow: TfFlow) -> Self {
        Self::with_provider(tfflow.provider())
    }

    pub fn with_provider(provider: Arc<FlowProvider>) -> Self {
        Self {
            provider,
            tool_router: Self::tool_router(),
        }
    }

    /// Serve the MCP server over stdio.
    pub async fn serve_stdio(tfflow: TfFlow) -> anyhow::Result<()> {
        use tokio::io::{stdin, stdout};

        let server = Self::new(tfflow);
        let transport = (stdin(), stdout());

        logging::info("Starting tfflow MCP server via stdio...");
        let service = server.serve(transport).await?;

        service.waiting().await?;

        Ok(())
    }

    #[tool(
        description = "Get the configuration schema of a provider resource type",
        annotations(title = "Get Resource Schema", read_only_hint = true)
    )]
    pub async fn get_resource_schema(
        &self,
        params: Parameters<ResourceTypeInput>,
    ) -> Result<CallToolResult, McpError> {
        logging::info("Executing get_resource_schema tool");
        let resource_type = params.0.resource_type.as_deref().unwrap_or(TYPE_NAME);
        match self.provider.schema(resource_type) {
            Ok(schema) => Ok(state_result(
                "schema",
                serde_json::to_value(schema).unwrap_or_default(),
            )),
            Err(diags) => Ok(diagnostics_result("get schema", diags)),
        }
    }

    #[tool(
        description = "Attach security groups to a network interface (empty list attaches the location's default group)",
        annotations(title = "Create Security Group Attachment", destructive_hint = true)
    )]
    pub async fn create_security_group_attachment(
        &self,
        params: Parameters<AttachmentInput>,
    ) -> Result<CallToolResult, McpError> {
        logging::info("Executing create_security_group_attachment tool");
        match self.provider.create(TYPE_NAME, to_value(params.0)).await {
            Ok(state) => Ok(state_result("state", state)),
            Err(diags) => Ok(diagnostics_result("create attachment", diags)),
        }
    }

    #[tool(
        description = "Refresh a security group attachment from the compute API",
        annotations(
            title = "Read Security Group Attachment",
            read_only_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn read_security_group_attachment(
        &self,
        params: Parameters<AttachmentInput>,
    ) -> Result<CallToolResult, McpError> {
        logging::info("Executing read_security_group_attachment tool");
        match self.provider.read(TYPE_NAME, to_value(params.0)).await {
            Ok(state) => Ok(state_result("state", state)),
            Err(diags) => Ok(diagnostics_result("read attachment", diags)),
        }
    }

    #[tool(
        description = "Change the security groups or the server of an attachment",
        annotations(title = "Update Security Group Attachment", destructive_hint = true)
    )]
    pub async fn update_security_group_attachment(
        &self,
        params: Parameters<AttachmentUpdateInput>,
    ) -> Result<CallToolResult, McpError> {
        logging::info("Executing update_security_group_attachment tool");
        let input = params.0;
        match self
            .provider
            .update(TYPE_NAME, to_value(input.prior_state), to_value(input.config))
            .await
        {
            Ok(state) => Ok(state_result("state", state)),
            Err(diags) => Ok(diagnostics_result("update attachment", diags)),
        }
    }

    #[tool(
        description = "Reset a network interface to its location's default security group",
        annotations(title = "Delete Security Group Attachment", destructive_hint = true)
    )]
    pub async fn delete_security_group_attachment(
        &self,
        params: Parameters<AttachmentInput>,
    ) -> Result<CallToolResult, McpError> {
        logging::info("Executing delete_security_group_attachment tool");
        match self.provider.delete(TYPE_NAME, to_value(params.0)).await {
            Ok(()) => Ok(state_result("state", Value::Null)),
            Err(diags) => Ok(diagnostics_result("delete attachment", diags)),
        }
    }

    #[tool(
        description = "Import an existing attachment by '<server_id>/<network_interface_id>'",
        annotations(
            title = "Import Security Group Attachment",
            read_only_hint = true,
            open_world_hint = true
        )
    )]
    pub async fn import_security_group_attachment(
        &self,
        params: Parameters<ImportInput>,
    ) -> Result<CallToolResult, McpError> {
        logging::info("Executing import_security_group_attachment tool");
        match self.provider.import(TYPE_NAME, &params.0.id).await {
            Ok(state) => Ok(state_result("state", state)),
            Err(diags) => Ok(diagnostics_result("import attachment", diags)),
        }
    }
}

// The ServerHandler trait requires this specific impl Future pattern
#[allow(clippy::manual_async_fn)]
impl ServerHandler for TfFlowServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "tfflow".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "tfflow manages the security groups attached to Flow compute network interfaces. Use the tools to create, read, update, delete or import attachments.".into(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            let tools = self.tool_router.list_all();
            Ok(ListToolsResult {
                tools,
                ..Default::default()
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let tool_context =
                rmcp::handler::server::tool::ToolCallContext::new(self, request, context);
            self.tool_router.call(tool_context).await
        }
    }
}
