use std::collections::HashMap;

pub(crate) const SERVICE_NAME: &str = "notionary";
const TOKEN_SERVER: &str = "session-token";

/// Store the session token in the system keyring via Secret Service.
pub async fn store_token(token: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", TOKEN_SERVER);

    keyring
        .create_item(
            "Notionary session token",
            &attrs,
            token.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| format!("Failed to store session token: {}", e))?;

    Ok(())
}

/// Load the session token from the system keyring, if one was stored.
pub async fn load_token() -> Result<Option<String>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", TOKEN_SERVER);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let token = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        if !token.is_empty() {
            return Ok(Some(token));
        }
    }

    Ok(None)
}

/// Delete the stored session token from the system keyring.
pub async fn delete_token() -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", TOKEN_SERVER);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete session token: {}", e))?;
    }

    Ok(())
}
