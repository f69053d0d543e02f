pub mod events;
pub mod sink;

pub use events::{
    AnalyticsEvent, CourseSectionTime, EventParams, LanguageSwitch, LearningResourceClick,
    COURSE_SECTION_TIME, LANGUAGE_SWITCH, LEARNING_RESOURCE_CLICK,
};
pub use sink::{AnalyticsSdk, ChannelSdk, DeliveredEvent, EventSink};
