//! `streamcall commands` — List the functions advertised to the model.

pub async fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let descriptors = streamcall_services::command_descriptors();

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    println!("Available commands ({}):", descriptors.len());
    for descriptor in &descriptors {
        println!("  {:<20} {}", descriptor.name, descriptor.description);
    }
    Ok(())
}
