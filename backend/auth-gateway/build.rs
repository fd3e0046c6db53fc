fn main() {
    // Auth gateway acts as gRPC CLIENT of account-service
    // We only need client code, not server implementations
    println!("cargo:rerun-if-changed=../proto/services/account_service.proto");

    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_protos(
            &["../proto/services/account_service.proto"],
            &["../proto/services/"],
        )
        .expect("Failed to compile account_service.proto for auth-gateway");
}
