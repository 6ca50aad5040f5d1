use std::sync::Arc;

use crate::{clock::Clock, db::OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub jwt_secret: Arc<str>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(orm: OrmConn, jwt_secret: impl Into<Arc<str>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orm,
            jwt_secret: jwt_secret.into(),
            clock,
        }
    }
}
