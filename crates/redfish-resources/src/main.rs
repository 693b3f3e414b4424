//! # Redfish Resources Demo
//!
//! Seeds an [`InMemoryService`] with a switch port's route set, then walks
//! through the client flow:
//! 1. Resolve the route set concurrently (one member is missing on purpose).
//! 2. Change a writable and a read-only field, and update.
//! 3. Refresh and show that only the writable field reached the service.
//!
//! Run with `RUST_LOG=debug` to see every request.

use redfish_common::logging::setup_tracing;
use redfish_common::{refresh, Updatable};
use redfish_resources::{list_referenced_route_set_entries, list_referenced_signatures, InMemoryService};
use serde_json::json;
use tracing::{info, warn, Instrument};

const ROUTE_SET: &str = "/redfish/v1/Fabrics/CXL/Switches/S1/Ports/P1/LPRT/0/RouteSet";
const SIGNATURES: &str = "/redfish/v1/Systems/1/SecureBoot/SecureBootDatabases/db/Signatures";

fn seed(service: &InMemoryService) {
    let routes: Vec<String> = (1..=4).map(|i| format!("{ROUTE_SET}/{i}")).collect();
    service.insert_collection(ROUTE_SET, &routes);
    // The last member is listed but never stored.
    for (i, uri) in routes.iter().take(3).enumerate() {
        service.insert(
            uri.as_str(),
            json!({
                "@odata.id": uri,
                "@odata.type": "#RouteSetEntry.v1_0_0.RouteSetEntry",
                "Id": (i + 1).to_string(),
                "Name": format!("Route {}", i + 1),
                "Description": "Route to downstream port",
                "EgressIdentifier": i,
                "HopCount": 1,
                "VCAction": 0,
                "Valid": true
            }),
        );
    }

    let signature = format!("{SIGNATURES}/1");
    service.insert_collection(SIGNATURES, &[signature.as_str()]);
    service.insert(
        signature.as_str(),
        json!({
            "@odata.id": signature,
            "Id": "1",
            "SignatureType": "EFI_CERT_X509_GUID",
            "SignatureTypeRegistry": "UEFI",
            "UefiSignatureOwner": "28d5e212-165b-4ca0-909b-c86b9cee0112"
        }),
    );
}

#[tokio::main]
async fn main() -> redfish_common::Result<()> {
    setup_tracing();

    let service = InMemoryService::new();
    seed(&service);
    let client = service.client();

    let (mut routes, errors) = list_referenced_route_set_entries(&client, ROUTE_SET).await;
    info!(resolved = routes.len(), "Route set resolved");
    if let Some(errors) = errors {
        warn!(%errors, "Some routes could not be retrieved");
    }

    let Some(route) = routes.first_mut() else {
        warn!("Route set is empty, nothing to update");
        return Ok(());
    };

    let span = tracing::info_span!("route_update", uri = route.entity.odata_id());
    async {
        route.hop_count = 3;
        route.description = "edited locally".to_string();
        info!(patch = ?route.patch_payload()?, "Pending changes");

        route.update().await?;
        refresh(route).await?;
        info!(
            hop_count = route.hop_count,
            description = %route.description,
            etag = ?route.entity.etag(),
            "Route after refresh"
        );
        Ok::<_, redfish_common::Error>(())
    }
    .instrument(span)
    .await?;

    let (signatures, _) = list_referenced_signatures(&client, SIGNATURES).await;
    for signature in &signatures {
        info!(
            id = signature.entity.id(),
            signature_type = %signature.signature_type,
            registry = ?signature.signature_type_registry,
            "Signature"
        );
    }

    Ok(())
}
