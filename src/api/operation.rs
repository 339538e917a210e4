//! Business operations served under `/api/v1`.

use std::fmt;

/// One business handler. The route table binds each operation to one or
/// more (method, path) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    LoginStatus,
    LoginQrcode,
    DeleteCookies,
    Publish,
    PublishVideo,
    ListFeeds,
    SearchFeeds,
    FeedDetail,
    UserProfile,
    PostComment,
    ReplyComment,
    MyProfile,
}

impl ApiOperation {
    pub const ALL: [ApiOperation; 12] = [
        ApiOperation::LoginStatus,
        ApiOperation::LoginQrcode,
        ApiOperation::DeleteCookies,
        ApiOperation::Publish,
        ApiOperation::PublishVideo,
        ApiOperation::ListFeeds,
        ApiOperation::SearchFeeds,
        ApiOperation::FeedDetail,
        ApiOperation::UserProfile,
        ApiOperation::PostComment,
        ApiOperation::ReplyComment,
        ApiOperation::MyProfile,
    ];

    /// Stable identifier, forwarded upstream and used as the tool name.
    pub fn name(self) -> &'static str {
        match self {
            ApiOperation::LoginStatus => "check_login_status",
            ApiOperation::LoginQrcode => "get_login_qrcode",
            ApiOperation::DeleteCookies => "delete_cookies",
            ApiOperation::Publish => "publish_content",
            ApiOperation::PublishVideo => "publish_with_video",
            ApiOperation::ListFeeds => "list_feeds",
            ApiOperation::SearchFeeds => "search_feeds",
            ApiOperation::FeedDetail => "get_feed_detail",
            ApiOperation::UserProfile => "user_profile",
            ApiOperation::PostComment => "post_comment_to_feed",
            ApiOperation::ReplyComment => "reply_comment_in_feed",
            ApiOperation::MyProfile => "get_my_profile",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ApiOperation::LoginStatus => "Check whether the account is logged in",
            ApiOperation::LoginQrcode => "Fetch a QR code for logging in",
            ApiOperation::DeleteCookies => "Clear the stored session cookies",
            ApiOperation::Publish => "Publish image and text content",
            ApiOperation::PublishVideo => "Publish video content",
            ApiOperation::ListFeeds => "List feed items",
            ApiOperation::SearchFeeds => "Search feed items by keyword",
            ApiOperation::FeedDetail => "Fetch the detail of a feed item",
            ApiOperation::UserProfile => "Update the user profile",
            ApiOperation::PostComment => "Post a comment on a feed item",
            ApiOperation::ReplyComment => "Reply to a comment on a feed item",
            ApiOperation::MyProfile => "Fetch the logged-in user's own profile",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
