//! Email subjects and bodies.

pub const CONFIRM_EMAIL_SUBJECT: &str = "Please confirm your email address";
pub const PASSWORD_RESET_SUBJECT: &str = "Reset your password";
pub const SAMPLES_ADDED_SUBJECT: &str = "New samples added to project";

const SIGNATURE: &str = "\nWith kind regards,\n\nYour data management team\n";

pub fn confirm_email(full_name: &str, confirmation_link: &str) -> String {
    format!(
        "Dear {full_name},\n\n\
         thank you for registering. Please confirm your email address by following the link below:\n\n\
         {confirmation_link}\n\
         {SIGNATURE}"
    )
}

pub fn password_reset(full_name: &str, reset_link: &str) -> String {
    format!(
        "Dear {full_name},\n\n\
         we received a request to reset your password. You can choose a new one here:\n\n\
         {reset_link}\n\n\
         If you did not request this, you can ignore this email.\n\
         {SIGNATURE}"
    )
}

pub fn samples_added_to_project(
    full_name: &str,
    project_title: &str,
    batch_name: &str,
    sample_uri: &str,
) -> String {
    format!(
        "Dear {full_name},\n\n\
         new samples were added to the project '{project_title}' as batch '{batch_name}'.\n\n\
         You can review them here: {sample_uri}\n\
         {SIGNATURE}"
    )
}
