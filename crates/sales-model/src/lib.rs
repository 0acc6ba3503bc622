pub mod record;
pub mod result;
pub mod view;

pub use record::{Dataset, Field, SalesRecord};
pub use result::{
    AggregateResult, CategoryValue, MonthLabelSum, MonthSum, ResultKind, TableRow,
};
pub use view::ViewOutput;
