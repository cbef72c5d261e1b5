pub mod defaults;
pub mod macros;
pub mod config_file;

//
// Types
//
pub type ClusterId = String;
pub type Name = String;
pub type LabelKey = String;
pub type LabelValue = String;

/// index assigned by the store on each committed write
pub type VersionIndex = u64;
