mod basics;
mod busy;
mod data;
mod transaction;
