use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = PathBuf::from("../proto");

    println!("cargo:rerun-if-changed=../proto/chat/v1/");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(
            PathBuf::from(std::env::var("OUT_DIR")?).join("chat_auth_descriptor.bin"),
        )
        .compile_protos(&["../proto/chat/v1/auth.proto"], &[proto_root])?;

    Ok(())
}
