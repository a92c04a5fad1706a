use std::future::Future;
use std::pin::Pin;

use stickynotes_protocol::{Reply, Request};

/// Request/response path from a window to the controller.
///
/// Implementations never fail at the transport level: a broken channel is
/// reported as a failed [`Reply`].
pub trait ControllerLink: Send + Sync {
    fn request(&self, request: Request) -> Pin<Box<dyn Future<Output = Reply> + Send + '_>>;
}
