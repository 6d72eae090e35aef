pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Reflection Snapshot JSON Format:");
    println!("================================");

    println!("\nA snapshot stands in for a reflection endpoint. `services` is optional;");
    println!("when omitted, every service declared in `files` is listed.");

    let snapshot = serde_json::json!({
        "services": "Array of Strings (Optional) - Fully-qualified service names",
        "files": "Array of File objects (Required)"
    });
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    println!("\nFile object:");
    let file = serde_json::json!({
        "name": "String (Required) - Unique file name, e.g. 'helloworld.proto'",
        "package": "String (Optional, Default: '')",
        "dependencies": "Array of Strings (Optional) - Directly imported file names",
        "messages": "Array of {name, fields: [{name, number, type_name, repeated}], nested_messages, nested_enums}",
        "enums": "Array of {name, values: [String]}",
        "services": "Array of {name, methods: [{name, input_type, output_type, client_streaming, server_streaming}]}",
        "extensions": "Array of {name, extendee, number}"
    });
    println!("{}", serde_json::to_string_pretty(&file)?);

    println!("\nExample:");
    let example = serde_json::json!({
        "files": [
            {
                "name": "helloworld.proto",
                "package": "helloworld",
                "dependencies": ["google/protobuf/timestamp.proto"],
                "messages": [{ "name": "HelloRequest", "fields": [{ "name": "name", "number": 1, "type_name": "string" }] }],
                "services": [{ "name": "Greeter", "methods": [{ "name": "SayHello", "input_type": "helloworld.HelloRequest", "output_type": "helloworld.HelloRequest" }] }]
            },
            { "name": "google/protobuf/timestamp.proto", "package": "google.protobuf", "messages": [{ "name": "Timestamp" }] }
        ]
    });
    println!("{}", serde_json::to_string_pretty(&example)?);

    Ok(())
}
