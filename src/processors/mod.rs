pub mod completeness;
pub mod dataset_preparer;

pub use completeness::{
    AllColumnsPresent, CompletenessPolicy, CompletenessPredicate, RequiredColumnsPresent,
};
pub use dataset_preparer::DatasetPreparer;
