mod helpers;
mod logs;
