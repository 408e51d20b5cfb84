pub mod checkbook;
pub mod dashboard;
pub mod dwolla;
pub mod identity;
pub mod plaid;
pub mod transfers;
