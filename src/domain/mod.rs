//! Domain logic - pure rules independent of files, build records and source control

pub mod declaration;
pub mod mapping;
pub mod options;

pub use declaration::DeclarationKind;
pub use mapping::{WorkspaceMapping, WorkspaceMappings};
pub use options::{RequestedFlags, StampOptions};
