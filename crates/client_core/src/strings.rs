#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizedKey {
    LogInToLeaveAComment,
    BecomeABackerToLeaveAComment,
    UnableToRemovePaymentMethod,
}

pub trait StringsProvider: Send + Sync {
    fn localized(&self, key: LocalizedKey) -> String;
}

pub struct EnglishStrings;

impl StringsProvider for EnglishStrings {
    fn localized(&self, key: LocalizedKey) -> String {
        match key {
            LocalizedKey::LogInToLeaveAComment => "Log in to leave a comment",
            LocalizedKey::BecomeABackerToLeaveAComment => "Become a backer to leave a comment",
            LocalizedKey::UnableToRemovePaymentMethod => {
                "Something went wrong and we were unable to remove your payment method, \
                 please try again."
            }
        }
        .to_string()
    }
}
