use once_cell::sync::Lazy;

use crate::{
    common::request::PageFetcher,
    extractors::{
        ali1688::Ali1688Extractor, amazon::AmazonExtractor, ebay::EbayExtractor,
        taobao::TaobaoExtractor, taobao_world::TaobaoWorldExtractor, tmall::TmallExtractor,
        ExtractOptions, Extractor,
    },
    ExtractorReturn,
};

#[derive(Debug)]
pub struct ExtractHandler {
    handler: Box<dyn Extractor>,
}
impl ExtractHandler {
    pub fn new<T>(handler: T) -> Self
    where
        T: Extractor + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.handler.name()
    }

    #[must_use]
    pub fn can_handle(&self, url: &str) -> bool {
        self.handler.can_handle(url)
    }

    pub fn extract(
        &self,
        fetcher: &dyn PageFetcher,
        options: &ExtractOptions,
        url: &str,
    ) -> ExtractorReturn {
        self.handler.extract(fetcher, options, url)
    }
}

pub static DEFAULT_EXTRACT_HANDLERS: Lazy<Vec<ExtractHandler>> =
    Lazy::new(default_extract_handlers);

#[must_use]
pub fn default_extract_handlers() -> Vec<ExtractHandler> {
    vec![
        ExtractHandler::new(AmazonExtractor),
        ExtractHandler::new(EbayExtractor),
        ExtractHandler::new(TaobaoExtractor),
        ExtractHandler::new(TmallExtractor),
        ExtractHandler::new(TaobaoWorldExtractor),
        ExtractHandler::new(Ali1688Extractor),
    ]
}
