pub mod incident;
pub mod resource;
pub mod responder;

pub use incident::Entity as IncidentRecord;
pub use resource::Entity as ResourceRecord;
pub use responder::Entity as ResponderRecord;
