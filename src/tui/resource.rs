/// Async state in a type-safe, explicit way, after Elm's RemoteData pattern.
///
/// - NotAsked: no request made yet
/// - Loading: request in progress
/// - Success: request completed with data
/// - Failure: request failed with error
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource<T, E = String> {
    NotAsked,
    Loading,
    Success(T),
    Failure(E),
}

impl<T, E> Resource<T, E> {
    /// Create a Resource from a Result
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(e) => Resource::Failure(e),
        }
    }

    /// Check if the resource is currently loading
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    /// Check if the resource has succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    /// Get a reference to the data if successful
    pub fn success(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }
}

impl<T, E> Default for Resource<T, E> {
    fn default() -> Self {
        Resource::NotAsked
    }
}
