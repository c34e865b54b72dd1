
#[cfg(test)]
mod attendee_tests;
#[cfg(test)]
mod question_tests;
#[cfg(test)]
mod session_tests;
