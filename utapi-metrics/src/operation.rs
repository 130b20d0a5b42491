use std::fmt;
use std::str::FromStr;

/// An S3 operation tracked by the metric engine.
///
/// Adding a variant requires an entry in [`Operation::ALL`] and both name
/// tables; the exhaustive matches below enforce this at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    CreateBucket,
    DeleteBucket,
    ListBucket,
    GetBucketAcl,
    PutBucketAcl,
    PutBucketWebsite,
    GetBucketWebsite,
    DeleteBucketWebsite,
    PutObject,
    CopyObject,
    UploadPart,
    ListBucketMultipartUploads,
    ListMultipartUploadParts,
    InitiateMultipartUpload,
    CompleteMultipartUpload,
    AbortMultipartUpload,
    DeleteObject,
    MultiObjectDelete,
    GetObject,
    GetObjectAcl,
    PutObjectAcl,
    HeadBucket,
    HeadObject,
}

impl Operation {
    /// Every tracked operation, in response order.
    pub const ALL: [Operation; 23] = [
        Operation::CreateBucket,
        Operation::DeleteBucket,
        Operation::ListBucket,
        Operation::GetBucketAcl,
        Operation::PutBucketAcl,
        Operation::PutBucketWebsite,
        Operation::GetBucketWebsite,
        Operation::DeleteBucketWebsite,
        Operation::PutObject,
        Operation::CopyObject,
        Operation::UploadPart,
        Operation::ListBucketMultipartUploads,
        Operation::ListMultipartUploadParts,
        Operation::InitiateMultipartUpload,
        Operation::CompleteMultipartUpload,
        Operation::AbortMultipartUpload,
        Operation::DeleteObject,
        Operation::MultiObjectDelete,
        Operation::GetObject,
        Operation::GetObjectAcl,
        Operation::PutObjectAcl,
        Operation::HeadBucket,
        Operation::HeadObject,
    ];

    /// The name under which this operation's counters are keyed in the
    /// backing store.
    ///
    /// These names are part of the on-disk format and must never change.
    pub fn storage_name(self) -> &'static str {
        match self {
            Operation::CreateBucket => "createBucket",
            Operation::DeleteBucket => "deleteBucket",
            Operation::ListBucket => "listBucket",
            Operation::GetBucketAcl => "getBucketAcl",
            Operation::PutBucketAcl => "putBucketAcl",
            Operation::PutBucketWebsite => "putBucketWebsite",
            Operation::GetBucketWebsite => "getBucketWebsite",
            Operation::DeleteBucketWebsite => "deleteBucketWebsite",
            Operation::PutObject => "putObject",
            Operation::CopyObject => "copyObject",
            Operation::UploadPart => "uploadPart",
            Operation::ListBucketMultipartUploads => "listBucketMultipartUploads",
            Operation::ListMultipartUploadParts => "listMultipartUploadParts",
            Operation::InitiateMultipartUpload => "initiateMultipartUpload",
            Operation::CompleteMultipartUpload => "completeMultipartUpload",
            Operation::AbortMultipartUpload => "abortMultipartUpload",
            Operation::DeleteObject => "deleteObject",
            Operation::MultiObjectDelete => "multiObjectDelete",
            Operation::GetObject => "getObject",
            Operation::GetObjectAcl => "getObjectAcl",
            Operation::PutObjectAcl => "putObjectAcl",
            Operation::HeadBucket => "headBucket",
            Operation::HeadObject => "headObject",
        }
    }

    /// The name under which this operation is reported in query responses.
    pub fn api_name(self) -> &'static str {
        match self {
            Operation::CreateBucket => "s3:CreateBucket",
            Operation::DeleteBucket => "s3:DeleteBucket",
            Operation::ListBucket => "s3:ListBucket",
            Operation::GetBucketAcl => "s3:GetBucketAcl",
            Operation::PutBucketAcl => "s3:PutBucketAcl",
            Operation::PutBucketWebsite => "s3:PutBucketWebsite",
            Operation::GetBucketWebsite => "s3:GetBucketWebsite",
            Operation::DeleteBucketWebsite => "s3:DeleteBucketWebsite",
            Operation::PutObject => "s3:PutObject",
            Operation::CopyObject => "s3:CopyObject",
            Operation::UploadPart => "s3:UploadPart",
            Operation::ListBucketMultipartUploads => "s3:ListBucketMultipartUploads",
            Operation::ListMultipartUploadParts => "s3:ListMultipartUploadParts",
            Operation::InitiateMultipartUpload => "s3:InitiateMultipartUpload",
            Operation::CompleteMultipartUpload => "s3:CompleteMultipartUpload",
            Operation::AbortMultipartUpload => "s3:AbortMultipartUpload",
            Operation::DeleteObject => "s3:DeleteObject",
            Operation::MultiObjectDelete => "s3:MultiObjectDelete",
            Operation::GetObject => "s3:GetObject",
            Operation::GetObjectAcl => "s3:GetObjectAcl",
            Operation::PutObjectAcl => "s3:PutObjectAcl",
            Operation::HeadBucket => "s3:HeadBucket",
            Operation::HeadObject => "s3:HeadObject",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_name())
    }
}

/// An error parsing an [`Operation`] from its storage name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOperationError;

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|operation| operation.storage_name() == s)
            .copied()
            .ok_or(ParseOperationError)
    }
}
