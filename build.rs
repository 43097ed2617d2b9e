use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata backing `--version` and the service info endpoints
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
