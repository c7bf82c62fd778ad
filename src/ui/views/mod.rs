mod burndown;
mod days_off;
mod feature_detail;
mod iteration_detail;
mod iteration_list;
mod release_features;
mod release_list;
mod standup;

pub use burndown::BurndownView;
pub use days_off::DaysOffView;
pub use feature_detail::FeatureDetailView;
pub use iteration_detail::IterationDetailView;
pub use iteration_list::IterationListView;
pub use release_features::ReleaseFeaturesView;
pub use release_list::ReleaseListView;
pub use standup::StandupView;
