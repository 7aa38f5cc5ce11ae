/// A rendered message ready to hand to a [`Mailer`](super::Mailer).
///
/// The sender address itself belongs to the transport; messages only choose
/// the display name shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub sender_name: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}
