#[actix_web::main]
async fn main() -> std::io::Result<()> {
    resume_render_server::run().await
}
