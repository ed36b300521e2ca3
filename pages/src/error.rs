#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to render error page template")]
    RenderTemplate,
    #[error("Failed to write error page to the response")]
    WriteResponse,
    #[error("Failed to load error page templates")]
    LoadTemplates,
    #[error("Failed to read configuration file")]
    ReadingConfig,
}
