mod load;
mod snapshot;

pub use load::{load_snapshot, parse_snapshot};
pub use snapshot::{
    CompanyRecord, ContactRecord, NetworkSnapshot, RelationshipKind, RelationshipRecord,
    UNASSIGNED_COMPANY_ID,
};
