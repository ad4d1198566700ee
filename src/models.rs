mod handler_result;
mod request;
mod routing;

pub use handler_result::{HandlerResult, Routed};
pub use request::Request;
pub use routing::{RouteError, RoutingDecision};
