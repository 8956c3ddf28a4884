pub mod gesture;

pub use gesture::{
    EpisodeRail, Navigation, SwipeTracker, TransitionController, WheelAccumulator,
};
