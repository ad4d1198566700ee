pub mod chart;
pub mod classifier;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod doctor;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod openweather;
pub mod retriever;
pub mod tui;
pub mod utils;

pub use chart::EmissionsMap;
pub use config::Settings;
pub use db::Database;
pub use dispatcher::{Dispatcher, DispatcherBuilder, MissingHandler};
pub use models::{HandlerResult, Request, RouteError, Routed, RoutingDecision};
pub use retriever::PassageStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_accessible_from_crate_root() {
        let db = Database::in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let request = Request::new(" test ").unwrap();
        assert_eq!(request.question(), "test");

        assert_eq!(
            RoutingDecision::from_label("visualize_data"),
            Some(RoutingDecision::Visualization)
        );

        let result = HandlerResult::text("done");
        assert!(result.chart().is_none());
    }
}
