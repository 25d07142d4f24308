mod calendar_dashboard;
mod dst;
mod due_now;
mod properties;
