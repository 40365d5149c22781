use tangle_proto::Hash;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum TraversalError {
    #[error("operation aborted")]
    OperationAborted,
    #[error("transaction not found: {0}")]
    TransactionNotFound(Hash),
    #[error("unable to find all tails: transaction not found: {0}")]
    FindAllTailsFailed(Hash),
    #[error("predicate failed: {0}")]
    Predicate(BoxError),
    #[error("consumer failed: {0}")]
    Consumer(BoxError),
    #[error("storage error: {0}")]
    Storage(BoxError),
}

impl TraversalError {
    pub fn predicate(err: impl Into<BoxError>) -> Self { TraversalError::Predicate(err.into()) }

    pub fn consumer(err: impl Into<BoxError>) -> Self { TraversalError::Consumer(err.into()) }

    pub fn storage(err: impl Into<BoxError>) -> Self { TraversalError::Storage(err.into()) }
}
