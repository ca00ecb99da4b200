//! Leadership oracle.
//!
//! Only the elected leader of an application may write relation data or
//! reconcile destinations. Election itself belongs to the orchestration
//! platform; this crate only asks.

pub trait Leadership {
  fn is_leader(&self) -> bool;
}

/// Leadership fixed for the lifetime of one hook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticLeader(pub bool);

impl Leadership for StaticLeader {
  fn is_leader(&self) -> bool {
    self.0
  }
}
