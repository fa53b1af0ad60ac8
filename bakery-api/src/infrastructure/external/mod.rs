pub mod cloudinary;
pub mod resend;
