pub mod cache;
pub mod docker;
pub mod inventory;
pub mod probe;
pub mod readiness;
pub mod test_results;

pub use cache::{CacheError, CacheStore, RedisCache, SharedCache};
pub use docker::{ContainerHealth, ContainerRuntime, ContainerState, DockerCli, SharedRuntime};
pub use probe::HttpProbe;
pub use readiness::{HostReadiness, InProcessReadiness, ServiceKind, SetupProgress, SetupStatus};
