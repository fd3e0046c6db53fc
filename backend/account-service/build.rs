// Build script for account-service
// Compiles account_service.proto for the gRPC server; client code is generated
// as well so integration tests can exercise the wire types.
fn main() {
    println!("cargo:rerun-if-changed=../proto/services/account_service.proto");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &["../proto/services/account_service.proto"],
            &["../proto/services"],
        )
        .expect("Failed to compile account_service.proto for account-service");
}
