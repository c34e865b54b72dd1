pub mod event;
pub mod question;
pub mod session;
pub mod session_feedback;

pub use event::{Event, EventCategory, Speaker};
pub use question::Question;
pub use session::{Session, SessionSpeaker, SessionType};
pub use session_feedback::{PREDEFINED_FEEDBACK_TAGS, SessionFeedback};
