//! Show or edit the stored profile.

use tracing::info;

use marigold_storefront::config::StorefrontConfig;
use marigold_storefront::models::ProfileInput;
use marigold_storefront::state::Storefront;

/// Print the stored profile.
///
/// # Errors
///
/// Returns an error if the storefront cannot be opened.
pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let storefront = open()?;
    let profile = storefront.profile().profile();

    if !profile.is_saved() {
        info!("No profile saved yet");
        return Ok(());
    }

    info!("Name:    {}", profile.name);
    info!(
        "Email:   {}",
        profile.email.map_or_else(|| "-".to_string(), |email| email.to_string())
    );
    info!("Phone:   {}", profile.phone.unwrap_or_else(|| "-".to_string()));
    info!("Address: {}", profile.address.unwrap_or_else(|| "-".to_string()));

    Ok(())
}

/// Validate and save profile fields.
///
/// # Errors
///
/// Returns an error if the storefront cannot be opened or validation
/// rejects the input.
pub fn set(
    name: String,
    email: String,
    phone: String,
    address: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let storefront = open()?;
    let input = ProfileInput {
        name,
        email,
        phone,
        address,
    };

    let saved = storefront.profile().update(&input)?;
    info!(name = %saved.name, "Profile saved");

    Ok(())
}

fn open() -> Result<Storefront, Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    Ok(Storefront::open(config)?)
}
