// Re-export modules for testing and external use
pub mod compute {
    pub mod api;
    pub mod client;
    pub mod model;

    // Re-export commonly used items
    pub use api::ComputeApi;
    pub use client::{ComputeError, FlowClient};
    pub use model::{Cursor, List, Location, NetworkInterface, SecurityGroup, Server};
}

pub mod provider {
    pub mod diagnostics;
    pub mod host;
    pub mod resource;
    pub mod schema;
    pub mod security_group_attachment;

    pub use diagnostics::{Diagnostic, Diagnostics, Severity};
    pub use host::FlowProvider;
    pub use resource::{Resource, ResourceError};
    pub use schema::{Attribute, AttributeType, Schema};
    pub use security_group_attachment::{SecurityGroupAttachment, SecurityGroupAttachmentData};
}

pub mod shared {
    pub mod logging;
}

pub mod core {
    pub mod tfflow;
}

pub mod mcp {
    pub mod server;
    pub mod types;
}

pub mod config;

// Re-export commonly used types for easier testing and external use
pub use core::tfflow::TfFlow;
pub use mcp::server::TfFlowServer;
pub use provider::host::FlowProvider;
