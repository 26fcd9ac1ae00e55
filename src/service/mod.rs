pub mod bindings;
pub mod instances;
pub mod mongo_admin;

pub use bindings::BindingService;
pub use instances::InstanceService;
pub use mongo_admin::MongoAdminService;
