// Domain-layer modules and shared errors/models
pub mod application_service {
    pub use crate::application_service::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod validation {
    pub use crate::validation::*;
}

pub mod errors {
    pub use crate::errors::*;
}
