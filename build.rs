fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path().unwrap());

    let out_dir = std::path::Path::new("src/proto");
    if !out_dir.exists() {
        std::fs::create_dir_all(out_dir)?;
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .out_dir(out_dir)
        .compile_protos(&["proto/inference.proto"], &["proto/"])?;

    println!("cargo:rerun-if-changed=proto/inference.proto");
    Ok(())
}
