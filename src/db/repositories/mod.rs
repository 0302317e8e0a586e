mod contests;
mod users;
mod walks;
