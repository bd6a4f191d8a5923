mod code_system;
mod ontology;

pub use code_system::*;
pub use ontology::*;
