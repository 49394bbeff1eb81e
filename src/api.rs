pub mod home_assistant;
pub mod octopus;
