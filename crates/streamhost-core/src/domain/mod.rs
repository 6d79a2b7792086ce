//! Domain types for streaming-backend provisioning.

mod binary;
mod provisioning;
mod service;

pub use binary::{ArchiveFormat, BinaryAsset, BinaryKind, ResolvedBinaries, binary_url};
pub use provisioning::{ProvisioningState, ProvisioningStatus};
pub use service::{BackendPreference, InstalledServiceRecord, ServiceInstallRecord};
