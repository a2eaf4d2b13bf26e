use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// File names directly under `dir`, sorted.
    fn list_files(&self, dir: &str) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

/// Read-only access to the remote memory repository.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}
